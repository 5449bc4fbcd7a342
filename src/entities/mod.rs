pub mod category;
pub mod comment;
pub mod post;
pub mod post_category;
pub mod post_comment;
pub mod reset_password_token;
pub mod token;
pub mod user;

pub mod prelude {
    pub use super::category::Entity as Category;
    pub use super::comment::Entity as Comment;
    pub use super::post::Entity as Post;
    pub use super::post_category::Entity as PostCategory;
    pub use super::post_comment::Entity as PostComment;
    pub use super::reset_password_token::Entity as ResetPasswordToken;
    pub use super::token::Entity as Token;
    pub use super::user::Entity as User;
}
