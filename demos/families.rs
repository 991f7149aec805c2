// Families demo: builds a small tree by path, restores preferences from a
// key/value store, drives it with crossterm key events and renders it into an
// in-memory buffer (no terminal required).
use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

use tui_itemtree::{ItemTree, ItemTreeStyle, ItemTreeView, TreeKeyBindings, TreeReason};

fn print_buffer(buffer: &Buffer) {
    let area = buffer.area;
    for y in area.top()..area.bottom() {
        let line: String = (area.left()..area.right())
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        println!("{line}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Preferences usually come from a config file; any string map works.
    let stored: HashMap<String, String> = [
        ("selectmode", "multi"),
        ("showroot", "false"),
        ("connectorstyle", "solid"),
        ("labelfgcolor", "white"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let mut tree = ItemTree::new();
    if let Err(err) = tree.load(&stored) {
        eprintln!("ignoring stored preferences: {err}");
    }

    for path in [
        "Flintstones/Fred",
        "Flintstones/Wilma",
        "Flintstones/Pebbles",
        "Simpsons/Homer",
        "Simpsons/Marge",
        "Simpsons/Bart",
        "Simpsons/Lisa",
        r"Pets/Santa's Little Helper",
        r"Pets/Dino \/ Baby Puss",
    ] {
        if let Err(err) = tree.add(path) {
            eprintln!("{path}: {err}");
        }
    }
    let _ = tree.close_path("Pets", false);

    // The callback reads the affected item and reason back from the tree.
    tree.set_callback(|tree| {
        let label = tree
            .callback_item()
            .and_then(|id| tree.item_pathname(id))
            .unwrap_or_default();
        match tree.callback_reason() {
            TreeReason::Selected => println!("selected   {label}"),
            TreeReason::Deselected => println!("deselected {label}"),
            TreeReason::Opened => println!("opened     {label}"),
            TreeReason::Closed => println!("closed     {label}"),
            other => println!("{other:?} {label}"),
        }
    });

    let bindings = TreeKeyBindings::new();
    let keys = [
        KeyEvent::new(KeyCode::Home, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT),
        KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT),
        KeyEvent::new(KeyCode::End, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Right, KeyModifiers::NONE),
    ];

    let style = ItemTreeStyle {
        title: Some(Line::from(" families ")),
        ..ItemTreeStyle::default()
    };
    let area = Rect::new(0, 0, 36, 10);
    for key in keys {
        let mut buffer = Buffer::empty(area);
        ItemTreeView::new(style.clone()).render(area, &mut buffer, &mut tree);
        tree.handle_key(&bindings, key);
    }

    let mut buffer = Buffer::empty(area);
    ItemTreeView::new(style).render(area, &mut buffer, &mut tree);
    print_buffer(&buffer);
}
