//#![warn(missing_docs)]

pub mod clock;

pub mod error;

pub mod hash;

pub mod name;

pub mod packet;

pub mod privacy;

pub mod cs;
