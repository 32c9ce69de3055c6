pub mod node;
pub mod session;
pub mod user;

pub use node::{Entity as Node, Model as NodeModel, NodeKind};
pub use session::{Entity as Session, Model as SessionModel};
pub use user::{Entity as User, Model as UserModel};
