/// The result of a successful login call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The bearer token to attach to subsequent requests.
    pub token: String,

    /// The display name reported by the backend, if any.
    pub display_name: Option<String>,
}
