/// Authentication and authorization
///
/// Session tokens are HS256 JWTs carried either in an `Authorization: Bearer`
/// header or in the `token` cookie. Passwords are bcrypt hashes, and password
/// resets go through a single-use random token stored on the user row.

mod jwt;
mod password;
mod reset;
mod extractor;

pub use jwt::{AuthKeys, Claims};
pub use password::{hash_password, verify_password, password_long_enough, MIN_PASSWORD_LEN};
pub use reset::{consume_reset_token, generate_reset_token, issue_reset_token, reset_link};
pub use extractor::{clear_session_cookie, session_cookie, AuthUser, TOKEN_COOKIE};
