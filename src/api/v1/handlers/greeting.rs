// GET /test, guarded by the `/test/**` rule.
pub async fn say_hello_test() -> &'static str {
    "Hello Test"
}
