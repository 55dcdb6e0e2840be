//! # Umbra Contracts
//!
//! Reusable access-control and token primitives for ledger-backed
//! applications, built around one hard idea: **shielded ownership**. A
//! module can prove "the caller controls the current owner" while the
//! public ledger stores nothing but a rotating hash commitment — no
//! owner identity, ever, in the clear.
//!
//! - **lifecycle** — `Initializable` (one-shot setup gate) and
//!   `Pausable` (circuit breaker), the guards everything else embeds.
//! - **shielded_ownable** — the one-step shielded ownership state
//!   machine and the commitment construction both variants share.
//! - **shielded_ownable_two_step** — the propose/accept variant with a
//!   pending-owner slot.
//! - **fungible_token** / **non_fungible_token** — ledger modules that
//!   consume `assert_only_owner` as their authorization gate, the way
//!   any contract composed on top of this family does.
//!
//! ## Design Principles
//!
//! 1. The secret nonce is a call-time capability, never a stored or
//!    serialized value. If it can't leak by construction, it won't leak
//!    by accident.
//! 2. Every transition is atomic: validate everything, then write, or
//!    fail with state untouched.
//! 3. Monetary paths use checked arithmetic. Always.
//! 4. Every public ledger type is serializable (serde) for wire
//!    transport and persistent storage — except secrets, which are not
//!    serializable on purpose.

pub mod fungible_token;
pub mod lifecycle;
pub mod non_fungible_token;
pub mod shielded_ownable;
pub mod shielded_ownable_two_step;
