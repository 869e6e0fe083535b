//! List-view controllers for the admin dashboard collections.
//!
//! A [`ListViewController`] owns one persisted collection, a derived filtered
//! view and a page cursor. Everything here is pure data handling; rendering is
//! left to whatever presentation layer consumes [`PageSlice`].

pub mod cart;
pub mod controller;
pub mod criteria;
pub mod dashboard;
pub mod ids;
pub mod pagination;
pub mod samples;

pub use cart::Cart;
pub use controller::{ListViewController, LoadOrder, LoadSource};
pub use criteria::Criteria;
pub use ids::IdStrategy;
pub use pagination::{paginate, PageSlice};
pub use samples::SampleRecords;
