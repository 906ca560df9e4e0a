mod interval_properties;
mod partition_properties;
