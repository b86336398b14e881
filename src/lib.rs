//! Git patch parsing and side-by-side diff reconstruction.
//!
//! [`diff`] turns unified or git-extended patch text into aligned rows,
//! [`side_by_side`] assembles those rows into two scroll-locked texts with
//! styles and a navigation index, and [`worker`] runs both off the calling
//! thread.

pub mod config;
pub mod diff;
pub mod output;
pub mod side_by_side;
pub mod worker;
