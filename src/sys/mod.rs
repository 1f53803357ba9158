pub mod jiffies;
