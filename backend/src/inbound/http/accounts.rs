//! Account handlers under `/auth`.
//!
//! ```text
//! POST /auth/login              email=ada@example.com&password=secret1
//! POST /auth/cerrar-sesion
//! POST /auth/registrar          display_name=Ada&email=..&password=..&repeat_password=..
//! GET  /auth/confirmar/{token}
//! POST /auth/olvide-password    email=ada@example.com
//! GET  /auth/olvide-password/{token}
//! POST /auth/olvide-password/{token}  password=..
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{
    AuthValidationError, Email, Error, LoginCredentials, NewPassword, Registration,
    RegistrationInput,
};

use super::error::ApiResult;
use super::gate::{LOGIN_PATH, OWNER_HOME_PATH};
use super::state::HttpState;
use super::validation::validate_form;

const RESET_REQUESTED: &str =
    "if the address belongs to an account, instructions have been sent to it";

/// Plain confirmation message.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login form.
#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct LoginForm {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Registration form.
#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct RegisterForm {
    #[validate(length(min = 1, message = "name is required"))]
    pub display_name: String,
    #[validate(email(message = "email is not valid"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub repeat_password: String,
}

/// Password reset request form.
#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct ForgotPasswordForm {
    #[validate(email(message = "email is not valid"))]
    pub email: String,
}

/// New password form.
#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct NewPasswordForm {
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

fn see_other(location: &str) -> actix_web::HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location.to_owned()));
    builder
}

/// Sign in and store the credential cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in", headers(("Set-Cookie" = String, description = "Credential cookie"))),
        (status = 400, description = "Invalid form", body = Error),
        (status = 401, description = "Unknown email or wrong password", body = Error),
        (status = 403, description = "Account not confirmed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    validate_form(&*form)?;
    let credentials = LoginCredentials::try_from_parts(&form.email, &form.password)?;
    let credential = state.accounts.login(&credentials).await?;
    Ok(see_other(OWNER_HOME_PATH)
        .cookie(state.cookies.issue(&credential))
        .finish())
}

/// Drop the credential cookie.
#[utoipa::path(
    post,
    path = "/auth/cerrar-sesion",
    responses((status = 303, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/cerrar-sesion")]
pub async fn logout(state: web::Data<HttpState>) -> HttpResponse {
    see_other(LOGIN_PATH).cookie(state.cookies.clear()).finish()
}

/// Create an unconfirmed account and mail the confirmation link.
#[utoipa::path(
    post,
    path = "/auth/registrar",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Account created", body = MessageResponse),
        (status = 400, description = "Invalid form or email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/registrar")]
pub async fn register(
    state: web::Data<HttpState>,
    form: web::Form<RegisterForm>,
) -> ApiResult<HttpResponse> {
    validate_form(&*form)?;
    let registration = Registration::try_new(RegistrationInput {
        display_name: &form.display_name,
        email: &form.email,
        password: &form.password,
        repeat_password: &form.repeat_password,
    })?;
    state.accounts.register(&registration).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new(
        "account created; check your email to confirm it",
    )))
}

/// Confirm an account from the emailed link.
#[utoipa::path(
    get,
    path = "/auth/confirmar/{token}",
    params(("token" = String, Path, description = "Confirmation token")),
    responses(
        (status = 200, description = "Account confirmed", body = MessageResponse),
        (status = 400, description = "Unknown token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "confirmAccount",
    security([])
)]
#[get("/auth/confirmar/{token}")]
pub async fn confirm(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.accounts.confirm(&token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("account confirmed")))
}

/// Mail a password reset link. The reply never reveals whether the address
/// is registered.
#[utoipa::path(
    post,
    path = "/auth/olvide-password",
    request_body(content = ForgotPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 202, description = "Request accepted", body = MessageResponse),
        (status = 400, description = "Invalid email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/auth/olvide-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    form: web::Form<ForgotPasswordForm>,
) -> ApiResult<HttpResponse> {
    validate_form(&*form)?;
    let email = Email::new(&form.email).map_err(AuthValidationError::from)?;
    state.accounts.request_password_reset(&email).await?;
    Ok(HttpResponse::Accepted().json(MessageResponse::new(RESET_REQUESTED)))
}

/// Check a password reset token before showing the new-password form.
#[utoipa::path(
    get,
    path = "/auth/olvide-password/{token}",
    params(("token" = String, Path, description = "Reset token")),
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 400, description = "Unknown token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "checkResetToken",
    security([])
)]
#[get("/auth/olvide-password/{token}")]
pub async fn check_reset_token(
    state: web::Data<HttpState>,
    token: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.accounts.check_reset_token(&token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("choose a new password")))
}

/// Store a new password and consume the reset token.
#[utoipa::path(
    post,
    path = "/auth/olvide-password/{token}",
    params(("token" = String, Path, description = "Reset token")),
    request_body(content = NewPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid password or unknown token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/auth/olvide-password/{token}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    token: web::Path<String>,
    form: web::Form<NewPasswordForm>,
) -> ApiResult<HttpResponse> {
    validate_form(&*form)?;
    let password = NewPassword::new(&form.password)?;
    state.accounts.reset_password(&token, &password).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("password changed")))
}
