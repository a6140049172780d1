//! Perihelion - persistence model for an OpenID Connect identity provider
//!
//! Registered clients, authorization codes, refresh tokens, device codes and
//! per-user client grants, with the column codecs used to store URL lists and
//! federated identity credentials.

pub mod codec;
pub mod entities;
pub mod errors;
pub mod model;
pub mod settings;
pub mod storage;
