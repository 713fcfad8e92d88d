/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`    — Interactive chat mode
- `history` — Saved-session management

These handlers are intentionally small and use the library components:
providers, the transcript store, and the retry layer.
*/

pub mod chat;
pub mod history;
