//! Activity timeline rendering.

use crate::domain::activity::ActivityEntry;
use crate::domain::types::EntityRef;
use crate::dto::activity::{TimelineItem, TimelinePageData};
use crate::gateway::ActivityReader;
use crate::services::ServiceResult;

/// Actor shown when an entry carries no actor name.
pub const SYSTEM_ACTOR: &str = "System";

pub const TIMESTAMP_FORMAT: &str = "%d %b %Y, %H:%M";

/// Renders entries in the order given; the timeline never re-sorts.
pub fn render_timeline(entries: &[ActivityEntry]) -> Vec<TimelineItem> {
    entries
        .iter()
        .map(|entry| {
            let descriptor = entry.action.descriptor();
            TimelineItem {
                id: entry.id.clone(),
                icon: descriptor.icon,
                label: descriptor.label,
                color: descriptor.color,
                summary: entry.action.summary(),
                actor: entry
                    .actor_name
                    .clone()
                    .unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
                timestamp: entry.created_at.format(TIMESTAMP_FORMAT).to_string(),
                created_at: entry.created_at.to_rfc3339(),
            }
        })
        .collect()
}

/// Fetches the activity log of an agreement or outlet and renders it.
pub async fn load_timeline<R>(reader: &R, entity: EntityRef) -> ServiceResult<TimelinePageData>
where
    R: ActivityReader + ?Sized,
{
    let entries = reader.fetch_activity(&entity).await.map_err(|err| {
        log::error!(
            "Failed to load activity for {} {}: {err}",
            entity.collection(),
            entity.id()
        );
        err
    })?;

    let entity_kind = match entity {
        EntityRef::Agreement(_) => "Agreement",
        EntityRef::Outlet(_) => "Outlet",
    };

    Ok(TimelinePageData {
        entity_kind,
        entity_id: entity.id().to_string(),
        items: render_timeline(&entries),
    })
}


#[cfg(all(test, feature = "test-mocks"))]
mod gateway_tests {
    use super::*;
    use crate::domain::types::OutletId;
    use crate::gateway::GatewayError;
    use crate::gateway::mock::MockCollaborator;
    use crate::services::ServiceError;
    use uuid::Uuid;

    #[actix_web::test]
    async fn load_timeline_queries_the_entity() {
        let outlet = EntityRef::Outlet(OutletId::from_uuid(Uuid::from_u128(5)));
        let mut reader = MockCollaborator::new();
        reader
            .expect_fetch_activity()
            .withf(move |entity| *entity == outlet)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let page = load_timeline(&reader, outlet).await.unwrap();
        assert_eq!(page.entity_kind, "Outlet");
        assert!(page.items.is_empty());
    }

    #[actix_web::test]
    async fn collaborator_failure_propagates() {
        let mut reader = MockCollaborator::new();
        reader
            .expect_fetch_activity()
            .returning(|_| Err(GatewayError::from_response(503, String::new())));

        let result = load_timeline(
            &reader,
            EntityRef::Outlet(OutletId::from_uuid(Uuid::nil())),
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Gateway(_))));
    }
}
