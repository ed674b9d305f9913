// src/authoring/categorize.rs

use crate::{
    authoring::{IdGenerator, Publisher, non_empty},
    models::question::{CategorizeItem, CategorizeQuestion},
};

/// Editable categorize question.
pub struct CategorizeDraft<F> {
    id: Option<String>,
    categories: Vec<String>,
    items: Vec<CategorizeItem>,
    image_url: Option<String>,
    publisher: Publisher<CategorizeQuestion, F>,
}

impl<F> CategorizeDraft<F>
where
    F: FnMut(&CategorizeQuestion),
{
    pub fn new(question: CategorizeQuestion, on_change: F) -> Self {
        Self {
            id: question.id.clone(),
            categories: question.categories.clone(),
            items: question.items.clone(),
            image_url: question.image_url.clone(),
            publisher: Publisher::new(question, on_change),
        }
    }

    /// Appends a category. Blank names are ignored.
    pub fn add_category(&mut self, name: &str) -> bool {
        let Some(name) = non_empty(name) else {
            return false;
        };
        self.categories.push(name);
        self.changed();
        true
    }

    /// Renames a category; items pointing at the old name follow it.
    pub fn rename_category(&mut self, index: usize, name: &str) {
        let Some(slot) = self.categories.get_mut(index) else {
            return;
        };
        let old = std::mem::replace(slot, name.to_string());
        for item in &mut self.items {
            if item.correct_category.as_deref() == Some(old.as_str()) {
                item.correct_category = Some(name.to_string());
            }
        }
        self.changed();
    }

    /// Removes a category and clears it as the correct answer of any item.
    pub fn remove_category(&mut self, index: usize) {
        if index >= self.categories.len() {
            return;
        }
        let removed = self.categories.remove(index);
        for item in &mut self.items {
            if item.correct_category.as_deref() == Some(removed.as_str()) {
                item.correct_category = None;
            }
        }
        self.changed();
    }

    /// Appends an item with a fresh id. Blank text is ignored.
    pub fn add_item(&mut self, text: &str, ids: &mut impl IdGenerator) -> Option<String> {
        let text = non_empty(text)?;
        let id = ids.next_id();
        self.items.push(CategorizeItem {
            id: id.clone(),
            text,
            correct_category: None,
        });
        self.changed();
        Some(id)
    }

    pub fn remove_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
            self.changed();
        }
    }

    pub fn set_item_text(&mut self, index: usize, text: &str) {
        if let Some(item) = self.items.get_mut(index) {
            item.text = text.to_string();
            self.changed();
        }
    }

    /// `""` means no correct category.
    pub fn set_item_category(&mut self, index: usize, category: &str) {
        if let Some(item) = self.items.get_mut(index) {
            item.correct_category = non_empty(category);
            self.changed();
        }
    }

    pub fn set_image_url(&mut self, url: &str) {
        self.image_url = non_empty(url);
        self.changed();
    }

    pub fn is_valid(&self) -> bool {
        self.validation_message().is_none()
    }

    pub fn validation_message(&self) -> Option<&'static str> {
        if self.categories.is_empty() {
            Some("Add at least one category")
        } else if self.items.is_empty() {
            Some("Add at least one item")
        } else if self.categories.iter().any(|c| c.trim().is_empty()) {
            Some("All categories must have text")
        } else if self.items.iter().any(|item| item.text.trim().is_empty()) {
            Some("All items must have text")
        } else {
            None
        }
    }

    pub fn build(&self) -> CategorizeQuestion {
        CategorizeQuestion {
            id: self.id.clone(),
            categories: self.categories.clone(),
            items: self.items.clone(),
            image_url: self.image_url.clone(),
        }
    }

    /// Hands out the current state even if it is not valid yet.
    pub fn finish(mut self) -> CategorizeQuestion {
        let question = self.build();
        self.publisher.force(question.clone());
        question
    }

    fn changed(&mut self) {
        let candidate = self.build();
        let valid = self.is_valid();
        self.publisher.offer(candidate, valid);
    }
}
