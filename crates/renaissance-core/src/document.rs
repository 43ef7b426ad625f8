//! The editable content document.
//!
//! A fixed tree: hero text, expertise areas, blog posts, testimonials. Every
//! leaf is text except a testimonial's rating. The JSON shape is strict:
//! every field is required and unknown fields are rejected, so a document
//! that parses is always fully populated.

use serde::{Deserialize, Serialize};

use crate::error::MalformedContentError;
use crate::field::{FieldRef, Miss, Node, Slot, locate_in, locate_in_mut, split_field};
use crate::path::PathStep;

/// Highest rating a testimonial may carry.
pub const MAX_RATING: u8 = 5;

/// The full editable content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub hero: Hero,
    pub expertise: Vec<ExpertiseArea>,
    pub blog: Vec<BlogPost>,
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
}

/// One expertise card. Icon and accent color are presentation concerns and
/// are not part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpertiseArea {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BlogPost {
    pub category: String,
    pub date: String,
    pub title: String,
    pub excerpt: String,
    pub read_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Testimonial {
    pub content: String,
    pub name: String,
    pub role: String,
    pub rating: u8,
}

impl Document {
    /// Parse and validate a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedContentError`] if the text is not JSON, does not
    /// match the document shape, or carries a rating above [`MAX_RATING`].
    pub fn from_json(text: &str) -> Result<Self, MalformedContentError> {
        let document: Self = serde_json::from_str(text)?;
        document.validate()?;
        Ok(document)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Only fails if `serde_json` fails to write, which a well-formed
    /// document never triggers.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn validate(&self) -> Result<(), MalformedContentError> {
        for (i, testimonial) in self.testimonials.iter().enumerate() {
            if testimonial.rating > MAX_RATING {
                return Err(MalformedContentError::Invalid {
                    reason: format!(
                        "testimonials[{i}].rating is {}, above the maximum of {MAX_RATING}",
                        testimonial.rating
                    ),
                });
            }
        }
        Ok(())
    }

    /// The content shown before anything has been saved.
    #[must_use]
    pub fn seed() -> Self {
        Self {
            hero: Hero {
                title: "Digital Renaissance".to_owned(),
                subtitle: "Engineering, security, automation and storytelling under one roof."
                    .to_owned(),
            },
            expertise: vec![
                area(
                    "Software Engineering",
                    "Full-stack development with modern frameworks and scalable architecture",
                    &["React & Node.js", "Cloud Architecture", "API Development"],
                ),
                area(
                    "Cybersecurity",
                    "Comprehensive security solutions and risk assessment for digital assets",
                    &["Penetration Testing", "Security Audits", "Compliance"],
                ),
                area(
                    "Virtual Assistant",
                    "AI-powered automation and intelligent business process optimization",
                    &["Process Automation", "AI Integration", "Workflow Design"],
                ),
                area(
                    "Journalism",
                    "Strategic content creation and digital storytelling for modern media",
                    &["Content Strategy", "Digital Media", "Brand Storytelling"],
                ),
                area(
                    "Information Systems",
                    "Data architecture and system integration for enterprise solutions",
                    &["Database Design", "System Integration", "Analytics"],
                ),
            ],
            blog: vec![
                post("Security", "Jan 2025", "Threat modeling for small teams", "5 min read"),
                post("Engineering", "Feb 2025", "Choosing boring infrastructure", "7 min read"),
                post("Automation", "Mar 2025", "Where assistants actually save time", "4 min read"),
            ],
            testimonials: vec![
                testimonial("Delivered ahead of schedule.", "A. Client", "CTO"),
                testimonial("Our audit findings dropped to zero.", "B. Client", "Security Lead"),
                testimonial("Clear writing, clear results.", "C. Client", "Editor"),
            ],
        }
    }
}

fn area(title: &str, description: &str, skills: &[&str]) -> ExpertiseArea {
    ExpertiseArea {
        title: title.to_owned(),
        description: description.to_owned(),
        skills: skills.iter().map(|s| (*s).to_owned()).collect(),
    }
}

fn post(category: &str, date: &str, title: &str, read_time: &str) -> BlogPost {
    BlogPost {
        category: category.to_owned(),
        date: date.to_owned(),
        title: title.to_owned(),
        excerpt: format!("Notes on {}.", title.to_lowercase()),
        read_time: read_time.to_owned(),
    }
}

fn testimonial(content: &str, name: &str, role: &str) -> Testimonial {
    Testimonial {
        content: content.to_owned(),
        name: name.to_owned(),
        role: role.to_owned(),
        rating: MAX_RATING,
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::seed()
    }
}

impl Node for Document {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "hero" => self.hero.locate(rest),
            "expertise" => locate_in(&self.expertise, rest),
            "blog" => locate_in(&self.blog, rest),
            "testimonials" => locate_in(&self.testimonials, rest),
            _ => Err(unknown(name)),
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "hero" => self.hero.locate_mut(rest),
            "expertise" => locate_in_mut(&mut self.expertise, rest),
            "blog" => locate_in_mut(&mut self.blog, rest),
            "testimonials" => locate_in_mut(&mut self.testimonials, rest),
            _ => Err(unknown(name)),
        }
    }
}

impl Node for Hero {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "title" => self.title.locate(rest),
            "subtitle" => self.subtitle.locate(rest),
            _ => Err(unknown(name)),
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "title" => self.title.locate_mut(rest),
            "subtitle" => self.subtitle.locate_mut(rest),
            _ => Err(unknown(name)),
        }
    }
}

impl Node for ExpertiseArea {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "title" => self.title.locate(rest),
            "description" => self.description.locate(rest),
            "skills" => self.skills.locate(rest),
            _ => Err(unknown(name)),
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "title" => self.title.locate_mut(rest),
            "description" => self.description.locate_mut(rest),
            "skills" => self.skills.locate_mut(rest),
            _ => Err(unknown(name)),
        }
    }
}

impl Node for BlogPost {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "category" => self.category.locate(rest),
            "date" => self.date.locate(rest),
            "title" => self.title.locate(rest),
            "excerpt" => self.excerpt.locate(rest),
            "readTime" => self.read_time.locate(rest),
            _ => Err(unknown(name)),
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "category" => self.category.locate_mut(rest),
            "date" => self.date.locate_mut(rest),
            "title" => self.title.locate_mut(rest),
            "excerpt" => self.excerpt.locate_mut(rest),
            "readTime" => self.read_time.locate_mut(rest),
            _ => Err(unknown(name)),
        }
    }
}

impl Node for Testimonial {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "content" => self.content.locate(rest),
            "name" => self.name.locate(rest),
            "role" => self.role.locate(rest),
            "rating" => self.rating.locate(rest),
            _ => Err(unknown(name)),
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        let (name, rest) = split_field(steps)?;
        match name {
            "content" => self.content.locate_mut(rest),
            "name" => self.name.locate_mut(rest),
            "role" => self.role.locate_mut(rest),
            "rating" => self.rating.locate_mut(rest),
            _ => Err(unknown(name)),
        }
    }
}

fn unknown(name: &str) -> Miss {
    Miss::UnknownField {
        name: name.to_owned(),
    }
}
