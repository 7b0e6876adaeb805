use crate::prelude::*;

/// Pick along the view ray and move the highlight to whatever is hovered
pub fn update_hover(
    mut controller: ResMut<MuseumController>,
    mut highlights: ResMut<HighlightTable>,
    targets: Query<(Entity, &Interactable, &Transform)>,
    mut materials: Query<&mut Material>,
) {
    let change = controller.update_hover(targets.iter());
    if change.is_empty() {
        return;
    }

    // Clear before highlighting so only one entity is ever lit
    if let Some(entity) = change.left {
        match materials.get_mut(entity) {
            Ok(mut material) => {
                highlights.clear(entity, &mut material);
            }
            Err(_) => {
                highlights.forget(entity);
            }
        }
    }

    if let Some(entity) = change.entered
        && let Ok(mut material) = materials.get_mut(entity)
    {
        let color = controller.settings().highlight_color;
        highlights.highlight(entity, &mut material, color);
    }

    log::trace!("Hover changed: {:?}", change);
}
