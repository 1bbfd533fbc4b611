mod holding;
mod id;
mod id_generator;
mod recurring;
mod transaction;

pub use holding::Holding;
pub use id::{Id, IdError};
pub use id_generator::{FixedIdGenerator, IdGenerator, TimestampIdGenerator, UuidIdGenerator};
pub use recurring::RecurringExpense;
pub use transaction::{Transaction, TransactionType};
