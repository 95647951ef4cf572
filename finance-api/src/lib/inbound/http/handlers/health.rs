/// Liveness check; answers without touching any dependency.
pub async fn health() -> &'static str {
    "Auth service is running"
}
