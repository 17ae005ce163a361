mod affiliate;
mod key;
mod payment;

pub use affiliate::*;
pub use key::*;
pub use payment::*;
