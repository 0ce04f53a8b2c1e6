//! Engine-level tests driving the orchestrator with scripted backends.

mod support;
