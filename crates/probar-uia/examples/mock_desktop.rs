//! Mock Desktop Example
//!
//! Walks through the automation API against a scripted desktop:
//! - capability discovery
//! - filters with bare, qualified and shortcut names
//! - typed reads, pattern calls and setters
//! - waiting for a window to close
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=probar_uia=debug cargo run --example mock_desktop -p probar-uia
//! ```

use probar_uia::mock::{ids, MockEffect, MockOracle};
use probar_uia::prelude::*;
use probar_uia::{init_logging, naming, Verbosity};
use std::time::Duration;

fn main() -> UiaResult<()> {
    init_logging(Verbosity::Verbose);
    println!("=== Probar UIA Mock Desktop Example ===\n");

    let oracle = build_desktop();
    let automation = Automation::new(oracle)?;

    demo_registry(&automation);
    demo_find(&automation)?;
    demo_patterns(&automation)?;
    demo_close(&automation)?;

    println!("\n=== Example Complete ===");
    Ok(())
}

fn build_desktop() -> MockOracle {
    let oracle = MockOracle::with_standard_catalog();
    let root = oracle.root_id();

    let notepad = oracle.add_child(root, "Untitled - Notepad");
    oracle.set_property(notepad, ids::CLASS_NAME, "Notepad");
    oracle.add_pattern(notepad, ids::WINDOW_PATTERN);

    let editor = oracle.add_child(notepad, "Text Editor");
    oracle.set_property(editor, ids::AUTOMATION_ID, "15");
    oracle.add_pattern(editor, ids::VALUE_PATTERN);
    oracle.set_property(editor, ids::VALUE_VALUE, "");
    oracle.set_property(editor, ids::VALUE_IS_READ_ONLY, false);

    let zoom = oracle.add_child(notepad, "Zoom");
    oracle.add_pattern(zoom, ids::RANGE_VALUE_PATTERN);
    oracle.set_property(zoom, ids::RANGE_VALUE_VALUE, 100.0);
    oracle.set_property(zoom, ids::RANGE_VALUE_IS_READ_ONLY, true);

    let close = oracle.add_child(notepad, "Close");
    oracle.add_pattern(close, ids::INVOKE_PATTERN);
    oracle.on_call(close, "Invoke", MockEffect::Remove);

    oracle
}

fn demo_registry(automation: &Automation<MockOracle>) {
    println!("--- Capability Registry ---");
    let registry = automation.registry();
    for (group, properties) in registry.properties() {
        let names: Vec<String> = properties.keys().map(|n| naming::to_uniform(n)).collect();
        println!("  {group}: {}", names.join(", "));
    }
    println!();
}

fn demo_find(automation: &Automation<MockOracle>) -> UiaResult<()> {
    println!("--- Finding Elements ---");
    let desktop = automation.desktop()?;
    let options = automation.find_options().timeout(Duration::from_millis(500));

    if let Some(window) = desktop.find_element(
        Filter::new().with("class_name", "Notepad").with("is_window", true),
        &options,
    )? {
        println!("  window: {}", window.get::<String>("name")?);
    }

    let read_only = desktop.find_elements(
        Filter::new().with("range_value__is_read_only", true),
        &options,
    )?;
    println!("  read-only range values: {}", read_only.len());

    let either = automation.condition(Filter::new().with("name", "Zoom"))?
        | automation.condition(Filter::new().with("name", "Close"))?;
    println!("  condition: {either}");
    let matches = desktop.find_many_with(either, &options)?;
    println!("  matched: {}", matches.len());
    println!();
    Ok(())
}

fn demo_patterns(automation: &Automation<MockOracle>) -> UiaResult<()> {
    println!("--- Patterns ---");
    let desktop = automation.desktop()?;
    let options = automation.find_options();
    let Some(editor) = desktop.find_element(Filter::new().with("automation_id", "15"), &options)?
    else {
        return Ok(());
    };

    for (group, properties) in editor.supported_properties()? {
        println!("  {group}: {} supported", properties.len());
    }
    editor.set("value", "Hello from probar-uia")?;
    println!("  editor value: {}", editor.get::<String>("value")?);
    println!("  read only: {}", editor.get::<bool>("value__is_read_only")?);
    println!();
    Ok(())
}

fn demo_close(automation: &Automation<MockOracle>) -> UiaResult<()> {
    println!("--- Waiting For Close ---");
    let desktop = automation.desktop()?;
    let options = automation.find_options();
    let Some(close) = desktop.find_element(Filter::new().with("name", "Close"), &options)? else {
        return Ok(());
    };
    close.invoke("invoke", &[])?;
    let gone = close.wait_unavailable(Duration::from_secs(1), false);
    println!("  close button gone: {gone}");
    Ok(())
}
