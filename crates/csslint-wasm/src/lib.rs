//! WASM bindings for csslint.
//!
//! Exposes `lint()` and `lintTokens()` to JavaScript via wasm-bindgen.
//! Both return a JS object `{ diagnostics, fault }`; `fault` is `null`
//! unless checking stopped early.

use csslint_lexer::{Dialect, DialectError, RawToken};
use csslint_parser::{LintOptions, LintReport, Linter};
use wasm_bindgen::prelude::*;

/// Lint stylesheet source.
///
/// `dialect` is `"css"` (default), `"less"` or `"scss"`. Throws on an
/// unknown dialect name.
#[wasm_bindgen]
pub fn lint(source: &str, dialect: Option<String>) -> Result<JsValue, JsError> {
    let linter = linter_for(dialect.as_deref()).map_err(|e| JsError::new(&e.to_string()))?;
    report_to_js(&linter.run(source))
}

/// Lint tokens from an editor highlighter.
///
/// `tokens` is an array of `{ style, text, line, column }` objects with
/// integer style codes. Throws if a token is malformed.
#[wasm_bindgen(js_name = lintTokens)]
pub fn lint_tokens(tokens: JsValue, dialect: Option<String>) -> Result<JsValue, JsError> {
    let linter = linter_for(dialect.as_deref()).map_err(|e| JsError::new(&e.to_string()))?;
    let tokens: Vec<RawToken> =
        serde_wasm_bindgen::from_value(tokens).map_err(|e| JsError::new(&e.to_string()))?;
    report_to_js(&linter.run_tokens(tokens))
}

/// Get the linter version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn linter_for(dialect: Option<&str>) -> Result<Linter, DialectError> {
    let dialect = match dialect {
        Some(name) => name.parse::<Dialect>()?,
        None => Dialect::default(),
    };
    Ok(Linter::new(LintOptions::new(dialect)))
}

fn report_to_js(report: &LintReport) -> Result<JsValue, JsError> {
    let diagnostics = serde_wasm_bindgen::to_value(&report.diagnostics)
        .map_err(|e| JsError::new(&e.to_string()))?;
    let fault: JsValue = match &report.fault {
        Some(fault) => fault.to_string().into(),
        None => JsValue::NULL,
    };

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"diagnostics".into(), &diagnostics)
        .map_err(|_| JsError::new("Failed to set diagnostics property"))?;
    js_sys::Reflect::set(&js_obj, &"fault".into(), &fault)
        .map_err(|_| JsError::new("Failed to set fault property"))?;

    Ok(js_obj.into())
}
