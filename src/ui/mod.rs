// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the PanelFlat application.

pub mod canvas;
pub mod dims_dialog;
pub mod toolbar;
