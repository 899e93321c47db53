//! Capability interface over the embedded third-party identity widget.
//!
//! The widget's internals are opaque; this system owns only the two
//! callback outcomes (success with an identity, failure with a message)
//! and the three operations below.

use std::sync::Arc;

use crate::state::auth::{AuthState, Identity};

/// Which view the widget opens with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Login,
    Signup,
}

/// Called by the widget after a successful sign-in. The second argument
/// is the provider's account payload, passed through untouched.
pub type SignInHandler = Box<dyn Fn(Identity, serde_json::Value) + Send + Sync>;

/// Called by the widget when sign-in fails
pub type ErrorHandler = Box<dyn Fn(String) + Send + Sync>;

pub trait IdentityWidget {
    fn initialize(
        &self,
        client_id: &str,
        target: &str,
        view: ViewMode,
        on_success: SignInHandler,
        on_error: ErrorHandler,
    );

    fn show_login(&self, target: &str);

    fn show_signup(&self, target: &str);
}

/// Wire the widget's callbacks into the auth state. Nothing else of the
/// widget lifecycle reaches the containers.
pub fn connect(
    widget: &dyn IdentityWidget,
    auth: Arc<AuthState>,
    client_id: &str,
    target: &str,
    view: ViewMode,
) {
    let on_success: SignInHandler = {
        let auth = Arc::clone(&auth);
        Box::new(move |identity, _account| auth.handle_sign_in(identity))
    };
    let on_error: ErrorHandler = Box::new(move |message| auth.handle_sign_in_error(&message));
    widget.initialize(client_id, target, view, on_success, on_error);
}
