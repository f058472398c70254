//! Subcommands. Every command prints pretty JSON on stdout.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use nurastays_core::api::FilePart;
use nurastays_core::models::{
    ContactSubmission, LeadFilter, PropertyFilter, PropertyOrdering, PropertyType, ReviewFilter,
};
use nurastays_core::SessionManager;

#[derive(Debug, Parser)]
#[command(name = "nurastays", version, about = "Nura Stays catalog and admin client")]
pub struct Cli {
    /// Backend base URL (overrides NURASTAYS_API_URL and the config file)
    #[arg(long, global = true, env = "NURASTAYS_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in to the admin back-office
    Login {
        email: String,
    },
    /// Sign out and forget the stored tokens
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Browse the property catalog
    Properties(PropertyArgs),
    /// Show one property and its reviews
    Property {
        slug: String,
    },
    /// List featured properties
    Featured,
    /// List guest reviews
    Reviews {
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List the team
    Team,
    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        message: String,
    },
    /// Admin back-office
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Debug, Args)]
pub struct PropertyArgs {
    #[arg(long)]
    search: Option<String>,
    /// apartment, house, studio, villa, cottage or penthouse
    #[arg(long = "type")]
    property_type: Option<String>,
    #[arg(long)]
    min_bedrooms: Option<u32>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// newest, price, -price or name
    #[arg(long, default_value = "newest", allow_hyphen_values = true)]
    ordering: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl PropertyArgs {
    fn to_filter(&self) -> Result<PropertyFilter> {
        let mut filter = PropertyFilter::default();
        if let Some(ref search) = self.search {
            filter = filter.search(search.clone());
        }
        if let Some(ref t) = self.property_type {
            let t = PropertyType::parse(t).with_context(|| format!("Unknown property type: {}", t))?;
            filter = filter.property_type(t);
        }
        if let Some(b) = self.min_bedrooms {
            filter = filter.min_bedrooms(b);
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            filter = filter.price_range(self.min_price, self.max_price);
        }
        let ordering = PropertyOrdering::parse(&self.ordering)
            .with_context(|| format!("Unknown ordering: {}", self.ordering))?;
        Ok(filter.ordering(ordering).page(self.page))
    }
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Dashboard counters
    Stats,
    /// All properties, including inactive ones
    Properties,
    /// Show or hide a property in the public catalog
    ToggleProperty {
        id: i64,
    },
    /// Upload gallery images for a property
    UploadImages {
        id: i64,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// All reviews, including unapproved ones
    Reviews,
    /// Approve or unapprove a review
    ToggleReview {
        id: i64,
    },
    /// Team members
    Team,
    /// Contact-form leads
    Leads {
        #[arg(long)]
        search: Option<String>,
        /// Only read (true) or unread (false) leads
        #[arg(long)]
        read: Option<bool>,
    },
    /// Toggle a lead between read and unread
    MarkLead {
        id: i64,
    },
    /// Delete a lead
    DeleteLead {
        id: i64,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn mime_for(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn read_image(path: &PathBuf) -> Result<FilePart> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    Ok(FilePart::new("images", file_name, mime_for(path), bytes))
}

pub async fn run(command: Command, session: &mut SessionManager) -> Result<()> {
    match command {
        Command::Login { email } => {
            let password = rpassword::prompt_password("Password: ")?;
            let user = session.login(&email, &password).await?;
            println!("Signed in as {}", user.display_name());
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out");
        }
        Command::Whoami => match session.restore().await {
            Some(user) => print_json(user)?,
            None => bail!("Not signed in. Run `nurastays login <email>`."),
        },
        Command::Properties(args) => {
            let page = session.api().properties(&args.to_filter()?).await?;
            print_json(&page)?;
        }
        Command::Property { slug } => {
            let api = session.api();
            let property = api.property_by_slug(&slug).await?;
            let reviews = api.reviews_for_property(property.id).await?;
            print_json(&serde_json::json!({ "property": property, "reviews": reviews }))?;
        }
        Command::Featured => {
            // Same pair of requests the home page makes
            let api = session.api();
            let (featured, stats) =
                futures::future::try_join(api.featured_properties(), api.review_stats()).await?;
            print_json(&serde_json::json!({ "featured": featured, "review_stats": stats }))?;
        }
        Command::Reviews { rating, page } => {
            let mut filter = ReviewFilter::default();
            if let Some(r) = rating {
                if !(1..=5).contains(&r) {
                    bail!("Rating must be between 1 and 5");
                }
                filter = filter.rating(r);
            }
            print_json(&session.api().reviews(&filter.page(page)).await?)?;
        }
        Command::Team => print_json(&session.api().team().await?)?,
        Command::Contact {
            name,
            email,
            phone,
            subject,
            message,
        } => {
            let submission = ContactSubmission {
                name,
                email,
                phone,
                subject,
                message,
            };
            print_json(&session.api().submit_contact(&submission).await?)?;
        }
        Command::Admin(admin) => run_admin(admin, session).await?,
    }
    Ok(())
}

async fn run_admin(command: AdminCommand, session: &mut SessionManager) -> Result<()> {
    if !session.api().tokens().has_tokens() {
        bail!("Not signed in. Run `nurastays login <email>`.");
    }
    let api = session.api();
    debug!(?command, "Running admin command");

    match command {
        AdminCommand::Stats => print_json(&api.dashboard_stats().await?)?,
        AdminCommand::Properties => print_json(&api.admin_properties(None).await?)?,
        AdminCommand::ToggleProperty { id } => {
            let properties = api.admin_properties(None).await?;
            let property = properties
                .results
                .iter()
                .find(|p| p.id == id)
                .with_context(|| format!("No property with id {}", id))?;
            print_json(&api.toggle_property_active(property).await?)?;
        }
        AdminCommand::UploadImages { id, files } => {
            let parts = files.iter().map(read_image).collect::<Result<Vec<_>>>()?;
            print_json(&api.upload_property_images(id, parts).await?)?;
        }
        AdminCommand::Reviews => print_json(&api.admin_reviews(None).await?)?,
        AdminCommand::ToggleReview { id } => {
            let reviews = api.admin_reviews(None).await?;
            let review = reviews
                .results
                .iter()
                .find(|r| r.id == id)
                .with_context(|| format!("No review with id {}", id))?;
            print_json(&api.toggle_review_approved(review).await?)?;
        }
        AdminCommand::Team => print_json(&api.admin_team().await?)?,
        AdminCommand::Leads { search, read } => {
            let filter = LeadFilter {
                search,
                is_read: read,
            };
            print_json(&api.admin_leads(&filter).await?)?;
        }
        AdminCommand::MarkLead { id } => {
            let leads = api.admin_leads(&LeadFilter::default()).await?;
            let lead = leads
                .results
                .iter()
                .find(|l| l.id == id)
                .with_context(|| format!("No lead with id {}", id))?;
            print_json(&api.toggle_lead_read(lead).await?)?;
        }
        AdminCommand::DeleteLead { id } => {
            api.delete_lead(id).await?;
            println!("Deleted lead {}", id);
        }
    }
    Ok(())
}
