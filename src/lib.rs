//! Curl-conforming vector basis operators for simplicial edge elements.
//!
//! The crate turns the geometry of one element (node coordinates, edge signs and face
//! orientation codes) into the small dense operators a weak-form assembler needs at every
//! integration point: the vector interpolation operator $E$, the nodal gradient operator $B$,
//! the curl operator $C$ and the curl-of-vector-potential operator $C_A$.
//!
//! A typical caller creates one engine per mesh group through the [`factory`], calls
//! [`basis::EdgeBasis::precompute`] once per integration rule and then, for each element,
//! [`basis::EdgeBasis::link`] followed by point-indexed operator queries.
use nalgebra::RealField;

pub mod basis;
pub mod cache;
pub mod element;
pub mod factory;
pub mod geometry;
pub mod local;
pub mod nabla;
pub mod orientation;
pub mod quadrature;
pub mod tables;
pub mod topology;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

/// Scalar type used throughout the crate.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
