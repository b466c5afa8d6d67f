/// Liveness probe. Never touches the store.
pub async fn home() -> &'static str {
    "Hello World!"
}
