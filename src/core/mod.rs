// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core annotation and perspective-correction logic, independent of the UI.

pub mod flattener;
pub mod session;
pub mod warp;
