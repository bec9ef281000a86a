// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed errors for the checks that run when a form-like command is submitted.
//! Everything else propagates as `anyhow::Error` with context.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid amount greater than 0, in whole cents")]
    Amount,

    #[error("Please enter a description")]
    Description,

    #[error("Name must be at least 2 characters")]
    Name,

    #[error("Please enter a valid email address")]
    Email,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter a goal name")]
    GoalName,

    #[error("Goal target must be greater than 0, in whole cents")]
    GoalTarget,

    #[error("Current amount cannot be negative and must be in whole cents")]
    GoalCurrent,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in. Run `budgetbloom login` first")]
    NotLoggedIn,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with email '{0}' already exists")]
    EmailTaken(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}
