//! Column names each source must expose after normalization.

/// Sales facts (`FactSale`).
pub mod sales {
    pub const INVOICE_ID: &str = "WWI Invoice ID";
    pub const INVOICE_DATE: &str = "Invoice Date Key";
    pub const CUSTOMER_KEY: &str = "Customer Key";
    pub const CITY_KEY: &str = "City Key";
    pub const STOCK_ITEM_KEY: &str = "Stock Item Key";
    pub const SALESPERSON_KEY: &str = "Salesperson Key";
    pub const DESCRIPTION: &str = "Description";
    pub const QUANTITY: &str = "Quantity";
    pub const UNIT_PRICE: &str = "Unit Price";
    pub const TOTAL_EXCLUDING_TAX: &str = "Total Excluding Tax";
    pub const TAX_AMOUNT: &str = "Tax Amount";
    pub const TOTAL_INCLUDING_TAX: &str = "Total Including Tax";
    pub const PROFIT: &str = "Profit";

    pub const REQUIRED: [&str; 13] = [
        INVOICE_ID,
        INVOICE_DATE,
        CUSTOMER_KEY,
        CITY_KEY,
        STOCK_ITEM_KEY,
        SALESPERSON_KEY,
        DESCRIPTION,
        QUANTITY,
        UNIT_PRICE,
        TOTAL_EXCLUDING_TAX,
        TAX_AMOUNT,
        TOTAL_INCLUDING_TAX,
        PROFIT,
    ];
}

pub mod customers {
    pub const KEY: &str = "Customer Key";
    pub const NAME: &str = "Customer";
    pub const REQUIRED: [&str; 2] = [KEY, NAME];
}

pub mod cities {
    pub const KEY: &str = "City Key";
    pub const CITY: &str = "City";
    pub const STATE_PROVINCE: &str = "State Province";
    pub const SALES_TERRITORY: &str = "Sales Territory";
    pub const REQUIRED: [&str; 4] = [KEY, CITY, STATE_PROVINCE, SALES_TERRITORY];
}

pub mod stock_items {
    pub const KEY: &str = "Stock Item Key";
    pub const NAME: &str = "Stock Item";
    pub const REQUIRED: [&str; 2] = [KEY, NAME];
}

pub mod employees {
    pub const KEY: &str = "Employee Key";
    pub const PREFERRED_NAME: &str = "Preferred Name";
    pub const REQUIRED: [&str; 2] = [KEY, PREFERRED_NAME];
}
