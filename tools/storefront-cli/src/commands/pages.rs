//! Pagination window preview.

use anyhow::{bail, Result};
use serde_json::json;
use storefront_core::pagination::PaginationState;

use super::PagesArgs;
use crate::context::Context;
use crate::output::format_window;

/// Run the pages command.
pub async fn run(args: PagesArgs, ctx: &Context) -> Result<()> {
    let state = state_from_args(&args)?;
    let window = state.window();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "page_number": state.page_number,
            "pages_count": state.pages_count(),
            "window": window,
            "has_prev": state.has_prev(),
            "has_next": state.has_next(),
        }));
        return Ok(());
    }

    ctx.output.kv("pages", &state.pages_count().to_string());
    if window.is_empty() {
        ctx.output.info("No results");
    } else {
        ctx.output
            .kv("window", &format_window(&window, state.page_number));
    }

    Ok(())
}

fn state_from_args(args: &PagesArgs) -> Result<PaginationState> {
    if args.size < 1 {
        bail!("--size must be at least 1, got {}", args.size);
    }
    if args.count < 0 {
        bail!("--count cannot be negative, got {}", args.count);
    }
    Ok(PaginationState::new(args.page, args.size, args.count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(page: i64, count: i64, size: i64) -> PagesArgs {
        PagesArgs { page, count, size }
    }

    #[test]
    fn test_window_from_args() {
        let state = state_from_args(&args(7, 200, 20)).unwrap();
        assert_eq!(state.pages_count(), 10);
        assert_eq!(state.window(), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(state_from_args(&args(1, 10, 0)).is_err());
        assert!(state_from_args(&args(1, -1, 10)).is_err());
    }
}
