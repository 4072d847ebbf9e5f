// SPDX-License-Identifier: MIT

pub mod contracts;
pub mod gas;
pub mod provider;
pub mod reads;
