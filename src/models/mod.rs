pub mod page;
pub mod user;
pub mod verification_token;

pub use page::{Entity as Page, Model as PageModel};
pub use user::{Entity as User, Model as UserModel};
pub use verification_token::{Entity as VerificationToken, Model as VerificationTokenModel};
