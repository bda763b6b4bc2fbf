/// What the user asked for from the toolbar this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    New,
    Save,
    DownloadPrimary,
    DownloadPng,
    Undo,
    Redo,
}

/// State the toolbar reflects
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolbarView<'a> {
    pub current_name: Option<&'a str>,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub fn toolbar(ctx: &egui::Context, view: ToolbarView<'_>) -> Option<ToolbarAction> {
    let mut action = None;

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button("+ New").on_hover_text("New Diagram").clicked() {
                action = Some(ToolbarAction::New);
            }
            if ui.button("Save").on_hover_text("Save Diagram").clicked() {
                action = Some(ToolbarAction::Save);
            }
            if ui.button("Download").on_hover_text("Download .bpmn file").clicked() {
                action = Some(ToolbarAction::DownloadPrimary);
            }
            if ui.button("PNG").on_hover_text("Download .png image").clicked() {
                action = Some(ToolbarAction::DownloadPng);
            }

            ui.separator();

            if ui
                .add_enabled(view.can_undo, egui::Button::new("Undo"))
                .on_hover_text("Undo (Ctrl+Z)")
                .clicked()
            {
                action = Some(ToolbarAction::Undo);
            }
            if ui
                .add_enabled(view.can_redo, egui::Button::new("Redo"))
                .on_hover_text("Redo (Ctrl+Shift+Z)")
                .clicked()
            {
                action = Some(ToolbarAction::Redo);
            }

            if let Some(name) = view.current_name {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.strong(name);
                });
            }
        });
    });

    action
}
