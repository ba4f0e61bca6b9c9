//! Plain-text rendering of catalog data.

use std::io::{self, Write};

use product_desk_core::{Category, Product};

/// Shown where a product has no absolute image URL.
const NO_IMAGE: &str = "(no image)";

/// One line per product: id, name, price, category.
pub fn product_list(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products found");
    }
    for product in products {
        writeln!(
            out,
            "{:<26} {:<40} {:>10}  {}",
            product.id.as_str(),
            product.name,
            product.price.to_string(),
            product.category_name().unwrap_or("-"),
        )?;
    }
    Ok(())
}

pub fn product_detail(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(out, "{}", product.name)?;
    writeln!(out, "  id:          {}", product.id)?;
    writeln!(out, "  slug:        {}", product.slug)?;
    writeln!(out, "  price:       {}", product.price)?;
    writeln!(out, "  category:    {}", product.category_name().unwrap_or("-"))?;
    writeln!(out, "  image:       {}", product.primary_image().unwrap_or(NO_IMAGE))?;
    writeln!(out, "  updated:     {}", product.updated_at.format("%Y-%m-%d %H:%M"))?;
    if !product.description.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.description)?;
    }
    Ok(())
}

pub fn category_list(out: &mut impl Write, categories: &[Category]) -> io::Result<()> {
    if categories.is_empty() {
        return writeln!(out, "No categories found");
    }
    for category in categories {
        writeln!(out, "{:<26} {}", category.id.as_str(), category.name)?;
    }
    Ok(())
}
