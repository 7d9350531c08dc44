pub mod book;
pub mod book_assignment;
pub mod star_balance;
pub mod star_transaction;
pub mod submission_draft;
pub mod user;

pub use book::Book;
