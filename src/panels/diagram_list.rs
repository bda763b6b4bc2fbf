use crate::document::Document;
use crate::templates::ExampleTemplate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction {
    Select(String),
    Delete(String),
    LoadExample(usize),
}

/// Sidebar with the stored documents, newest first, and the example workflows
pub fn diagram_list(
    ctx: &egui::Context,
    documents: &[Document],
    current_id: Option<&str>,
    examples: &[ExampleTemplate],
    examples_open: &mut bool,
) -> Option<ListAction> {
    let mut action = None;

    egui::SidePanel::left("diagram_list")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Diagrams");
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                if documents.is_empty() {
                    ui.weak("No diagrams yet");
                }

                for doc in documents {
                    let is_active = current_id == Some(doc.id.as_str());
                    ui.horizontal(|ui| {
                        if ui.small_button("×").on_hover_text("Delete diagram").clicked() {
                            action = Some(ListAction::Delete(doc.id.clone()));
                        }
                        if ui.selectable_label(is_active, &doc.name).clicked() && !is_active {
                            action = Some(ListAction::Select(doc.id.clone()));
                        }
                    });
                }

                ui.add_space(8.0);
                let header = egui::CollapsingHeader::new("Examples")
                    .open(Some(*examples_open))
                    .show(ui, |ui| {
                        for (index, example) in examples.iter().enumerate() {
                            if ui
                                .button(example.name)
                                .on_hover_text(example.description)
                                .clicked()
                            {
                                action = Some(ListAction::LoadExample(index));
                            }
                        }
                    });
                if header.header_response.clicked() {
                    *examples_open = !*examples_open;
                }
            });
        });

    action
}
