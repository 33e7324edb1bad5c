// SPDX-License-Identifier: Apache-2.0

//! CLI command modules.

pub mod run;
pub mod validate;
pub mod view;
