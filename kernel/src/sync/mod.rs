mod intr;

pub use self::intr::{IntrGuard, IntrState};
