//! Command handlers

use std::fs;
use std::path::{Path, PathBuf};

use domain_architecture::designer::UNNAMED_ARCHITECTURE;
use domain_architecture::export;
use domain_architecture::{
    ArchitectureService, CostCalculator, CreateArchitecture, Designer, ExportFormat,
    HttpArchitectureRepository, ListParams, ServiceCategory,
};
use eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;

/// Palette entry with its price in the default region
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry<'a> {
    id: &'a str,
    name: &'a str,
    pricing_unit: &'a str,
    base_price: f64,
    starting_price: f64,
    options: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct CatalogGroup<'a> {
    category: ServiceCategory,
    services: Vec<CatalogEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct Exported {
    path: PathBuf,
    format: ExportFormat,
    resources: usize,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn designer(config: &Config) -> Designer {
    let mut designer = Designer::default();
    designer.set_default_region(&config.default_region);
    designer
}

fn service(config: &Config) -> Result<ArchitectureService<HttpArchitectureRepository>> {
    let repository = HttpArchitectureRepository::new(
        config.gateway.api_url.clone(),
        config.gateway.api_token.clone(),
        config.gateway.timeout,
    )?;
    Ok(ArchitectureService::new(repository))
}

/// Read a snapshot file in the `CreateArchitecture` shape
fn read_snapshot(path: &Path) -> Result<CreateArchitecture> {
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("Invalid snapshot file {}", path.display()))
}

pub fn catalog(config: &Config) -> Result<()> {
    let designer = designer(config);
    let calculator = CostCalculator::default();

    let groups: Vec<CatalogGroup<'_>> = designer
        .services()
        .list_by_category()
        .into_iter()
        .map(|group| CatalogGroup {
            category: group.category,
            services: group
                .services
                .into_iter()
                .map(|service| CatalogEntry {
                    id: &service.id,
                    name: &service.name,
                    pricing_unit: &service.pricing_unit,
                    base_price: service.base_price,
                    starting_price: calculator.starting_price(service, designer.default_region()),
                    options: service
                        .configurable_options
                        .iter()
                        .map(|opt| opt.id.as_str())
                        .collect(),
                })
                .collect(),
        })
        .collect();

    print_json(&groups)
}

pub fn regions(config: &Config) -> Result<()> {
    print_json(&designer(config).regions().regions())
}

pub fn estimate(config: &Config, file: &Path) -> Result<()> {
    let snapshot = read_snapshot(file)?;
    let mut designer = designer(config);
    designer.import(snapshot.nodes, snapshot.edges);

    print_json(&designer.cost_breakdown())
}

pub async fn export(
    config: &Config,
    file: Option<&Path>,
    id: Option<Uuid>,
    format: ExportFormat,
    out_dir: Option<&Path>,
) -> Result<()> {
    let mut designer = designer(config);

    let (document, file_name) = match (file, id) {
        (Some(file), _) => {
            let snapshot = read_snapshot(file)?;
            designer.import(snapshot.nodes, snapshot.edges);
            let name = Some(snapshot.name.trim()).filter(|n| !n.is_empty());
            let architecture = designer.architecture();
            (
                export::export(
                    format,
                    architecture.nodes(),
                    architecture.edges(),
                    name.unwrap_or(UNNAMED_ARCHITECTURE),
                ),
                format.file_name(name),
            )
        }
        (None, Some(id)) => {
            designer.load(service(config)?.load(id).await?);
            (designer.export(format), designer.export_file_name(format))
        }
        (None, None) => eyre::bail!("Either --file or --id is required"),
    };

    let dir = out_dir.unwrap_or(&config.export_dir);
    fs::create_dir_all(dir).wrap_err_with(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, document).wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), format = %format, "Export written");
    print_json(&Exported {
        path,
        format,
        resources: designer.architecture().nodes().len(),
    })
}

pub async fn list(config: &Config, skip: usize, limit: usize) -> Result<()> {
    let list = service(config)?.list(ListParams { skip, limit }).await?;
    print_json(&list)
}

pub async fn show(config: &Config, id: Uuid) -> Result<()> {
    let saved = service(config)?.load(id).await?;
    let mut designer = designer(config);
    designer.load(saved.clone());

    print_json(&serde_json::json!({
        "architecture": saved,
        "costs": designer.cost_breakdown(),
    }))
}

pub async fn save(
    config: &Config,
    file: &Path,
    id: Option<Uuid>,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let service = service(config)?;
    let snapshot = read_snapshot(file)?;
    let mut designer = designer(config);

    if let Some(id) = id {
        designer.load(service.load(id).await?);
    }
    designer.import(snapshot.nodes, snapshot.edges);

    let name = name.unwrap_or(&snapshot.name);
    let description = description.or(snapshot.description.as_deref());
    let saved = service.save(designer.save_request(name, description)).await?;
    designer.apply_saved(&saved);

    info!(architecture_id = %saved.id, total = designer.total_cost(), "Architecture saved");
    print_json(&saved)
}

pub async fn delete(config: &Config, id: Uuid) -> Result<()> {
    service(config)?.delete(id).await?;
    print_json(&serde_json::json!({ "deleted": id }))
}

pub async fn duplicate(config: &Config, id: Uuid) -> Result<()> {
    let copy = service(config)?.duplicate(id).await?;
    print_json(&copy)
}

pub async fn publish(config: &Config, id: Uuid, private: bool) -> Result<()> {
    let saved = service(config)?.set_public(id, !private).await?;
    print_json(&saved)
}
