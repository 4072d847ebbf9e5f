// SPDX-License-Identifier: MIT

pub mod network;
