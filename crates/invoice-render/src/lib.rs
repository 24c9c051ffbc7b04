//! Rendering layer for lesson-invoice.
//!
//! Turns a finished [`invoice_core::models::RenderedInvoice`] into output
//! documents: a self-contained HTML invoice and a plain-text table for
//! terminal use. Renderers only format what the core already computed; no
//! totals are re-derived here.

pub mod html;
pub mod text;

pub use invoice_core as core;
