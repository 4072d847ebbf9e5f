// SPDX-License-Identifier: MIT

pub mod engine;
pub mod evaluator;
pub mod quote;
