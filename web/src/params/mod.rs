//! This module holds typed parameters for various endpoint inputs.
//!
//! The purpose of this module is to define and manage the parameters that are used as inputs
//! and outputs for the endpoints in the web application. Request bodies arrive in the camelCase
//! shape browsers send; query strings keep the snake_case names of their fields.

pub(crate) mod integration;
pub(crate) mod oauth;
