// SPDX-License-Identifier: MIT

pub mod constants;
pub mod error;
pub mod opportunity;
pub mod path;
pub mod token;
pub mod venue;
