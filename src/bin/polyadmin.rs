//! Operator CLI for the polymorphic admin.
//!
//! Inspects the configured admin site and operates on stored records
//! without going through the web interface.
//!
//! # Usage
//!
//! ```bash
//! # Registered child types per base type
//! cargo run --bin polyadmin -- types
//!
//! # Effective fieldsets of a concrete type
//! cargo run --bin polyadmin -- fieldsets shop.car
//!
//! # Template candidates and the one that resolves
//! cargo run --bin polyadmin -- templates shop.boat change_form
//!
//! # Concrete type of a record
//! cargo run --bin polyadmin -- resolve shop.vehicle 3
//!
//! # Delete a record (asks for confirmation)
//! cargo run --bin polyadmin -- delete shop.vehicle 3
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `ADMIN_MANIFEST`, `DATABASE_URL` (or `DB_*`),
//! `PK_PATTERN`, `POLYMORPHIC_LIST`. Without a database, `resolve` and
//! `delete` run against the manifest's seed records.

use polymorphic_admin::admin::templates::{CHANGE_FORM, TemplateResolver};
use polymorphic_admin::admin::{AdminRequest, AdminSite, LoadedSite};
use polymorphic_admin::config::{self, Config};
use polymorphic_admin::domain::entities::ModelKey;
use polymorphic_admin::error::AppError;
use polymorphic_admin::server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::collections::HashMap;

/// CLI tool for inspecting and operating the polymorphic admin.
#[derive(Parser)]
#[command(name = "polyadmin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered child types per base type
    Types,

    /// Show the effective fieldsets of a concrete type
    Fieldsets {
        /// Concrete type, e.g. `shop.car`
        model: ModelKey,
    },

    /// Show template candidates for a concrete type
    Templates {
        /// Concrete type, e.g. `shop.car`
        model: ModelKey,

        /// Template action
        #[arg(default_value = CHANGE_FORM)]
        action: String,
    },

    /// Resolve a record to its concrete type
    Resolve {
        /// Base type, e.g. `shop.vehicle`
        base: ModelKey,
        /// Primary key
        pk: String,
    },

    /// Delete a record through its concrete type's admin
    Delete {
        /// Base type, e.g. `shop.vehicle`
        base: ModelKey,
        /// Primary key
        pk: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;
    let loaded = server::load_site(&config)?;

    match cli.command {
        Commands::Types => show_types(&loaded.site),
        Commands::Fieldsets { model } => show_fieldsets(&loaded.site, &model)?,
        Commands::Templates { model, action } => show_templates(&loaded.site, &model, &action)?,
        Commands::Resolve { base, pk } => resolve(&config, loaded, &base, &pk).await?,
        Commands::Delete { base, pk, yes } => delete(&config, loaded, &base, &pk, yes).await?,
    }

    Ok(())
}

/// Prints every parent admin with its registry in registration order.
///
/// ```text
/// Vehicles (shop.vehicle)  pk: \d+  polymorphic list: no
///   shop.car    Car     hidden
///   shop.boat   Boat    in index
/// ```
fn show_types(site: &AdminSite) {
    println!("{}", "Registered types".bright_blue().bold());
    println!();

    let mut parents = site.parents().peekable();
    if parents.peek().is_none() {
        println!("{}", "  No parent admins registered".yellow());
        return;
    }

    for parent in parents {
        let meta = parent.model();
        let config = parent.config();
        println!(
            "{} ({})  pk: {}  polymorphic list: {}",
            meta.verbose_name_plural.bright_white().bold(),
            meta.key.to_string().cyan(),
            config.pk_pattern.bright_black(),
            if config.polymorphic_list { "yes" } else { "no" }
        );

        for descriptor in parent.registry().list_types() {
            let visibility = if descriptor.show_in_index {
                "in index".green()
            } else {
                "hidden".bright_black()
            };
            println!(
                "  {:<24} {:<20} {}",
                descriptor.model.to_string().cyan(),
                descriptor.label(),
                visibility
            );
        }
        println!();
    }
}

fn show_fieldsets(site: &AdminSite, model: &ModelKey) -> Result<()> {
    let child = site
        .child(model)
        .with_context(|| format!("{model} has no child admin"))?;

    println!(
        "{} {}",
        "Fieldsets for".bright_blue().bold(),
        model.to_string().cyan()
    );
    println!("  Form: {}", child.form().name.bright_white());
    println!();

    for fieldset in child.fieldsets() {
        let marker = if fieldset.collapsible {
            " (collapsible)".bright_black()
        } else {
            "".normal()
        };
        println!("  {}{}", fieldset.name.bright_white().bold(), marker);
        for field in &fieldset.fields {
            println!("    - {}", field);
        }
    }

    Ok(())
}

fn show_templates(site: &AdminSite, model: &ModelKey, action: &str) -> Result<()> {
    let child = site
        .child(model)
        .with_context(|| format!("{model} has no child admin"))?;
    let candidates = child.candidate_templates(action);
    let resolved = site.templates().resolve(&candidates);

    println!(
        "{} {} / {}",
        "Templates for".bright_blue().bold(),
        model.to_string().cyan(),
        action
    );
    for (i, path) in candidates.iter().enumerate() {
        let chosen = resolved.as_ref().is_some_and(|r| &r.path == path);
        if chosen {
            println!("  {}. {}  {}", i + 1, path.green().bold(), "<- used".green());
        } else {
            println!("  {}. {}", i + 1, path);
        }
    }

    if resolved.is_none() {
        println!();
        println!("{}", "  No candidate is available".red());
    }

    Ok(())
}

async fn resolve(config: &Config, loaded: LoadedSite, base: &ModelKey, pk: &str) -> Result<()> {
    let parent = loaded
        .site
        .parent(base)
        .with_context(|| format!("{base} has no parent admin"))?;
    let records = server::connect_records(config, loaded.seed).await?;

    match parent.registry().resolve(records.as_ref(), pk).await {
        Ok(descriptor) => {
            println!(
                "{} {} #{} -> {} ({})",
                "Resolved".green().bold(),
                base,
                pk,
                descriptor.model.to_string().cyan(),
                descriptor.label()
            );
            Ok(())
        }
        Err(e @ AppError::UnregisteredType { .. }) => {
            println!("{} {}", "Unregistered type:".red().bold(), e);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete(
    config: &Config,
    loaded: LoadedSite,
    base: &ModelKey,
    pk: &str,
    skip_confirm: bool,
) -> Result<()> {
    let parent = loaded
        .site
        .parent(base)
        .with_context(|| format!("{base} has no parent admin"))?;
    let records = server::connect_records(config, loaded.seed).await?;

    let descriptor = parent.registry().resolve(records.as_ref(), pk).await?;
    let record = records
        .get(base, pk)
        .await?
        .with_context(|| format!("{base} #{pk} disappeared"))?;

    println!("{}", "Delete record".bright_blue().bold());
    println!();
    println!("  Type:  {}", descriptor.label().cyan());
    println!("  Label: {}", record.label(descriptor.meta()));
    println!("  PK:    {}", pk.bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this record?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let request = AdminRequest::post(HashMap::new(), HashMap::new());
    descriptor
        .handler
        .delete_view(records.as_ref(), pk, &request)
        .await?;
    println!("{}", "Record deleted".green().bold());

    Ok(())
}
