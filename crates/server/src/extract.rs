//! Request extractors whose rejections render as [`AppError`]
//!
//! Drop-in replacements for the axum extractors of the same name, so a
//! malformed path, query string or body still answers with a `{"detail"}`
//! body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// JSON request body. Responses keep using [`axum::Json`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);
