//! Pipeline stages for MHTML-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! archive ──▶ normalize ──▶ inline ──▶ render ──▶ validate
//! (MIME walk)  (QP + tree)  (data URIs) (Chromium)  (lopdf)
//! ```
//!
//! 1. [`archive`]   — walk the multipart tree; recover the HTML part and a
//!    map of base64 resources as data URIs
//! 2. [`normalize`] — undo quoted-printable artifacts, strip Office markup
//!    noise via a structural tree pass
//! 3. [`inline`]    — rewrite `src`/`data-image-src` references so the
//!    document is self-contained
//! 4. [`render`]    — hand the HTML to the external engine behind the
//!    [`render::RenderEngine`] trait; runs in `spawn_blocking`
//! 5. [`validate`]  — acceptance-check produced (and pre-existing) PDFs

pub mod archive;
pub mod inline;
pub mod normalize;
pub mod render;
pub mod validate;
