use crate::api::{fetch_profiles, fetch_services, ApiError, ProfileSummary, ServiceCatalog};
use crate::config::Config;
use crate::ui::{
    MessageBlock, NoticeLevel, OutputMode, PlainRenderer, Renderer, ServiceCounts, TableSpec,
};

use super::{buffered_renderer, into_output, RunnerError};

pub(super) fn run_services(config: &Config) -> Result<String, RunnerError> {
    let catalog = with_activity("fetching services", || fetch_services(&config.server))?;
    let mut renderer = buffered_renderer();
    render_services(&catalog, &mut renderer)?;
    into_output(renderer)
}

pub(super) fn run_profiles(config: &Config) -> Result<String, RunnerError> {
    let profiles = with_activity("fetching profiles", || fetch_profiles(&config.server))?;
    let mut renderer = buffered_renderer();
    render_profiles(&profiles, &mut renderer)?;
    into_output(renderer)
}

fn with_activity<T>(
    label: &str,
    fetch: impl FnOnce() -> Result<T, ApiError>,
) -> Result<T, RunnerError> {
    let mut progress = PlainRenderer::stderr(OutputMode::from_env());
    let activity = progress.activity(label)?;
    match fetch() {
        Ok(value) => {
            activity.succeed(label);
            Ok(value)
        }
        Err(err) => {
            activity.fail(label);
            Err(err.into())
        }
    }
}

pub(super) fn render_services<R: Renderer>(
    catalog: &ServiceCatalog,
    renderer: &mut R,
) -> Result<(), RunnerError> {
    renderer.section("Services")?;
    let services = catalog.all();
    if services.is_empty() {
        renderer.notice(NoticeLevel::Info, "no services reported")?;
    } else {
        let mut counts = ServiceCounts::default();
        let rows = services
            .iter()
            .map(|(kind, service)| {
                let status = service.status.as_deref().unwrap_or("unknown");
                counts.record(status);
                vec![
                    service.name.clone(),
                    kind.to_string(),
                    status.to_owned(),
                    service.image.clone().unwrap_or_else(|| "-".to_owned()),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        renderer.table(&TableSpec::new(&["name", "type", "status", "image"], rows))?;
        renderer.service_counts(counts)?;
    }
    for error in catalog.errors() {
        renderer.warning_block(&MessageBlock::new("Category unavailable", error))?;
    }
    Ok(())
}

pub(super) fn render_profiles<R: Renderer>(
    profiles: &[ProfileSummary],
    renderer: &mut R,
) -> Result<(), RunnerError> {
    if profiles.is_empty() {
        renderer.section("Profiles")?;
        renderer.notice(NoticeLevel::Info, "no profiles found")?;
        return Ok(());
    }
    let items = profiles
        .iter()
        .map(|profile| {
            let mut line = profile.name.clone();
            if let Some(count) = profile.services_count {
                line.push_str(&format!(" ({count} services)"));
            }
            if let Some(description) = profile.description.as_deref().filter(|d| !d.is_empty()) {
                line.push_str(&format!(": {description}"));
            }
            line
        })
        .collect::<Vec<String>>();
    renderer.bullet_list("Profiles", &items)?;
    Ok(())
}
