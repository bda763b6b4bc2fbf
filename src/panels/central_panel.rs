use crate::editor::EditorAdapter;
use crate::widget::MountPoint;

pub const EMPTY_STATE_TEXT: &str = "Create a new diagram or select one from the sidebar.";

/// Canvas and properties panel for the open diagram, or the empty state.
///
/// Mount points only exist while something is being edited, so the adapter
/// tears its widget down as soon as the session goes idle.
pub fn central_panel(ctx: &egui::Context, adapter: &mut EditorAdapter, content: Option<(String, &str)>) {
    let Some((key, body)) = content else {
        adapter.unload();
        adapter.mount(None, None);
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.weak(EMPTY_STATE_TEXT);
            });
        });
        return;
    };

    adapter.mount(
        Some(MountPoint::new("diagram_canvas")),
        Some(MountPoint::new("diagram_properties")),
    );
    adapter.load(&key, body);

    egui::SidePanel::right("diagram_properties")
        .resizable(true)
        .default_width(320.0)
        .show(ctx, |ui| adapter.panel_ui(ui));

    egui::CentralPanel::default().show(ctx, |ui| {
        if let Some(err) = adapter.last_import_error() {
            ui.colored_label(ui.visuals().error_fg_color, format!("Could not open diagram: {}", err));
        }
        adapter.canvas_ui(ui);
    });
}
